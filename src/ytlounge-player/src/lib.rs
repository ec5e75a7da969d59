mod media_player;

pub use media_player::{map_state, LoungeMediaPlayer};
