mod common;
mod polling_round;
mod session_recovery;
