//! Collections of the application, one module per migration step.

mod m0001;
mod m0002;
mod m0003;
mod m0004;
mod m0005;
mod m0006;

use hearth_migrator::{Ledger, MigratorError, Migrator};

pub const USERS: &str = "users";
pub const USERS_ID: &str = "_pb_users_auth_";

pub const PREFERENCES: &str = "preferences";
pub const PREFERENCES_ID: &str = "pbc_3124412806";

pub const USER_PROFILES: &str = "user_profiles";
pub const USER_PROFILES_ID: &str = "pbc_2546118371";

pub const PRESETS: &str = "presets";
pub const PRESETS_ID: &str = "pbc_432047489";

/// Migrator with every built-in migration registered.
pub fn new<L: Ledger + 'static>(ledger: L) -> Result<Migrator, MigratorError> {
    let mut migrator = Migrator::new(ledger);

    migrator
        .add_migration(m0001::migration()?)?
        .add_migration(m0002::migration()?)?
        .add_migration(m0003::migration()?)?
        .add_migration(m0004::migration()?)?
        .add_migration(m0005::migration()?)?
        .add_migration(m0006::migration()?)?;

    Ok(migrator)
}
