/// This module provides delimited and fixed-width item readers and writers.
pub mod flat;
