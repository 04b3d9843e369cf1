mod bank_tests;
mod common;
