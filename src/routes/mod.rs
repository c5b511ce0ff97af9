pub mod check;
pub mod health;
pub mod inspect;
pub mod playlist;
