pub mod board_transform;
