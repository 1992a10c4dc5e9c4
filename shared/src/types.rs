/// Unique identifier of an object within a [`World`](crate::World).
pub type ObjectId = u32;

/// Identifier of a connected player. `0` means "unowned".
pub type PlayerId = u32;

/// One logical simulation tick. Monotonically increasing on the server;
/// a client may rewind it during re-enactment but restores it before the
/// next external tick.
pub type StepCount = u32;

/// Per-player monotonic counter stamped onto every input.
pub type MessageIndex = u32;

/// Ids at or above this value are allocated locally by clients for shadow
/// objects. Ids below it always originate on the server. This partition is
/// the sole marker of authority.
pub const CLIENT_ID_SPACE: ObjectId = 1_000_000;

/// Room every player and object belongs to until assigned elsewhere.
pub const DEFAULT_ROOM: &str = "/lobby";

/// Nominal step period at the default 60Hz step rate.
pub const DEFAULT_STEP_PERIOD_MS: f64 = 1000.0 / 60.0;
