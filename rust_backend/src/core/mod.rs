//! Core domain models for natal chart analysis.
//!
//! This module defines the fundamental data structures used throughout the planner,
//! representing celestial bodies, zodiac signs, aspects, and the sanitized chart
//! that every analysis stage consumes.

pub mod domain;
