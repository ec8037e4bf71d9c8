use clap::{Parser, Subcommand};

const VERSION: &str = env!("GIT_VERSION");

#[derive(Parser)]
#[command(
    name = "taskmarket",
    version = VERSION,
    about = "Household task marketplace: tasks, bids, payments and helper earnings",
    after_help = "\
NOTE:
  Data lives in $TASKMARKET_HOME, or ./.taskmarket when unset.
  Run `taskmarket init` before any other command.
  Identity comes from --as <user> and --role client|helper.

EXIT CODES:
  0  Success
  1  Error (authorization, invalid transition, storage, etc.)

LIFECYCLE:
  open → assigned → in_progress → completed    (any non-terminal → cancelled)
  Accepting a bid moves the task straight from open to in_progress and
  rejects every other submitted bid on it.

LEDGER:
  Paying a completed task credits the accepted helper exactly once.
  `earnings withdraw` pays out the whole available balance minus a 5%
  contribution."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Acting user id
    #[arg(long = "as", global = true)]
    pub actor: Option<String>,

    /// Acting role: client or helper
    #[arg(long, global = true)]
    pub role: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the marketplace database
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Bids on tasks
    #[command(subcommand)]
    Bid(BidCommands),

    /// Pay for a completed task (client)
    #[command(after_help = "\
NOTE:
  The amount must equal the accepted bid's price exactly.
  A task can be paid once; repeating the call fails with ALREADY_PAID.")]
    Pay {
        task_id: String,
        #[arg(long)]
        amount: i64,
    },

    /// Helper earnings and withdrawals
    #[command(subcommand)]
    Earnings(EarningsCommands),

    /// List notifications for the acting user
    Notifications,
}

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Post a new task (client)
    Post {
        /// Task title
        title: String,
        /// cleaning, gardening, moving, home_maintenance, painting or other
        #[arg(long)]
        category: String,
        /// Lowest acceptable bid
        #[arg(long)]
        min_price: i64,
        /// Highest acceptable bid
        #[arg(long)]
        max_price: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: Option<String>,
        /// Free-form estimate, e.g. "2-3"
        #[arg(long)]
        hours: Option<String>,
    },
    /// List open tasks, or your own with --mine
    List {
        #[arg(long)]
        mine: bool,
    },
    /// Show task details and its bids
    Show { id: String },
    /// open → assigned
    Assign { id: String },
    /// assigned → in_progress
    Start { id: String },
    /// in_progress → completed
    Complete { id: String },
    /// Cancel a task (→ cancelled)
    Cancel { id: String },
}

#[derive(Subcommand)]
pub enum BidCommands {
    /// Bid on an open task (helper)
    Submit {
        task_id: String,
        #[arg(long)]
        price: i64,
        #[arg(long)]
        message: Option<String>,
    },
    /// Withdraw your bid (helper)
    Withdraw { bid_id: String },
    /// Accept a bid, rejecting all others (client)
    Accept { task_id: String, bid_id: String },
    /// Reject a single bid (client)
    Reject { task_id: String, bid_id: String },
    /// List bids on a task, or your own bids without --task
    List {
        #[arg(long)]
        task: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum EarningsCommands {
    /// Show total, available and withdrawn amounts
    Balance,
    /// Withdraw the whole available balance
    Withdraw,
    /// List earnings records and withdrawals
    History,
}
