// Parsing of raw store cells into periods and prices.

pub mod cell;
