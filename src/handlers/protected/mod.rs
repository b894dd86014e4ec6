// handlers/protected/mod.rs - endpoints that need an authenticated caller
//
// Menu writes and dish creation authenticate through the `AuthUser`
// extractor, which must stay the first argument so it runs before any
// body is read. Direct dish routes sit behind `require_auth`.
pub mod dish_image;
pub mod dishes;
pub mod menu_dishes;
pub mod menus;
