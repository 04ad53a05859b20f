pub mod segment_store;

mod binary_integration;
mod sorted_integration;
mod sorted_set_integration;
