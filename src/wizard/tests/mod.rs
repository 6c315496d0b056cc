mod common;

mod controller;
mod steps;
