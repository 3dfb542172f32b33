//! # history-pager CLI
//!
//! Command-line interface for the commit history pager.
//!
//! ## Usage
//! ```bash
//! history-pager log ~/src/project --page-size 20
//! history-pager log ~/src/project --search fix --output json
//! ```

mod cli;

use commit_history_pager::Result;

fn main() -> Result<()> {
    cli::run()
}
