mod common;
mod filter;
