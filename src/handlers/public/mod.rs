// handlers/public/mod.rs - endpoints open to anonymous callers
//
// Reads of menus and of a menu's dishes, stored images, and service status.
// An optional `AuthUser` is still extracted where the visibility rule for
// anonymous callers applies.
pub mod media;
pub mod menu_dishes;
pub mod menus;
pub mod system;
