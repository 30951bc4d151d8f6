mod common;
mod config;
mod long_trip;
