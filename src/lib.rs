//! Transit Platform Simulation Library
//!
//! The boarding rules, track timing, and passenger queueing core of a
//! two-sided train platform game. Presentation is left to the caller.

pub mod simulation;
