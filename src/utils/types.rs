//! Shared type aliases used throughout the server

/// Unique ID of a player row
pub type PlayerID = u32;
/// Unique ID of a scheduled event row
pub type EventID = u32;
/// A season identified by its calendar year
pub type SeasonYear = i32;
/// Network port type
pub type Port = u16;
