//! Integration tests, registered with the test inventory

mod liblocked;
mod wiring;
