//! Feature modules for Warden.
//!
//! Each module talks to the dispatch core only through
//! [`Module`](warden_framework::Module): a descriptor declaring its
//! capability hooks, plus the handlers it adds to the table.
//!
//! | Module | Commands | Capabilities |
//! |--------|----------|--------------|
//! | [`Bios`] | `/setme`, `/me`, `/setbio`, `/bio` | help, user info, GDPR |
//! | [`SysTools`] | `/status` | none |
//! | [`WebTools`] | `/ping`, `/cping`, `/ip` | none |
//!
//! ```rust,ignore
//! let privileges = Privileges::new(config.bot.owner_id, config.bot.sudoers());
//! let runtime = runtime
//!     .with_module(Bios::in_memory(privileges.clone()))
//!     .with_module(SysTools::new())
//!     .with_module(WebTools::new(privileges));
//! ```

pub mod access;
pub mod error;
pub mod systools;
pub mod userinfo;
pub mod webtools;

#[cfg(test)]
pub(crate) mod testing;

pub use access::Privileges;
pub use error::{ModuleError, ModuleResult};
pub use systools::{SysTools, SystemSnapshot};
pub use userinfo::{Bios, InMemoryUserInfo, UserInfoRepository};
pub use webtools::{PingTime, WebTools, parse_ping_time, speed_convert};
