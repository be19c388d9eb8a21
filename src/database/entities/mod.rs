pub mod events;
pub mod player_stats;
pub mod players;
pub mod season_stats;

pub type Event = events::Model;
pub type Player = players::Model;
