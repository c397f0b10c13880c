/// Maximum participant name length in bytes.
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum participant id length in bytes (wallet addresses fit comfortably).
pub const MAX_PARTICIPANT_ID_LENGTH: usize = 64;

/// Maximum token symbol length in bytes.
pub const MAX_SYMBOL_LENGTH: usize = 16;

/// Maximum mint address length in bytes (base58 Solana addresses are 32..=44 chars).
pub const MAX_MINT_ADDRESS_LENGTH: usize = 64;

/// Tic-Tac-Toe board cells.
pub const TIC_TAC_TOE_CELLS: usize = 9;

/// Connect-4 board dimensions.
pub const CONNECT4_ROWS: usize = 6;
pub const CONNECT4_COLUMNS: usize = 7;

/// Cards dealt to each UNO hand at the start of a match.
pub const UNO_STARTING_HAND: usize = 7;

/// Battleship board side length; cells are indexed `row * 10 + col`.
pub const BATTLESHIP_SIZE: usize = 10;
pub const BATTLESHIP_CELLS: usize = BATTLESHIP_SIZE * BATTLESHIP_SIZE;

/// Monopoly board length.
pub const MONOPOLY_SPACES: usize = 40;

/// Monopoly money defaults.
pub const MONOPOLY_STARTING_MONEY: i64 = 1_500;
pub const MONOPOLY_GO_SALARY: i64 = 200;
pub const MONOPOLY_JAIL_BAIL: i64 = 50;

/// Space index of the jail cell.
pub const MONOPOLY_JAIL_SPACE: u8 = 10;

/// Failed doubles attempts before bail is forced.
pub const MONOPOLY_MAX_JAIL_TURNS: u8 = 3;

/// Consecutive doubles that send a player to jail.
pub const MONOPOLY_MAX_DOUBLES: u8 = 3;

/// Default per-turn time budget.
pub const DEFAULT_TURN_MS: u64 = 30_000;

/// Consecutive timeouts after which a seat forfeits.
pub const DEFAULT_MAX_CONSECUTIVE_TIMEOUTS: u8 = 2;

/// Rejection codes relayed to the submitting client.
pub const ERROR_NOT_YOUR_TURN: &str = "NOT_YOUR_TURN";
pub const ERROR_ILLEGAL_MOVE: &str = "ILLEGAL_MOVE";
pub const ERROR_INVALID_PHASE: &str = "INVALID_PHASE";
pub const ERROR_MATCH_ALREADY_COMPLETE: &str = "MATCH_ALREADY_COMPLETE";
pub const ERROR_MATCH_ABORTED: &str = "MATCH_ABORTED";
