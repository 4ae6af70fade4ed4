mod check;
mod cli;
mod common;
