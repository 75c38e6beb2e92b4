use super::*;

mod classes_and_style;
mod events_and_ready;
mod network;
