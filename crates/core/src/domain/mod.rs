pub mod checkup;
pub mod decision;
pub mod home_feed;
pub mod news;
pub mod portfolio;
pub mod signal;
