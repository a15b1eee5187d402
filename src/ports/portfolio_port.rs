//! Portfolio snapshot port trait.

use crate::domain::error::SwingtraderError;
use crate::domain::sizing::PortfolioState;

pub trait PortfolioPort {
    /// Current portfolio snapshot, including today's realized P&L. The
    /// engine treats the snapshot as immutable for one evaluation.
    fn fetch_portfolio(&self) -> Result<PortfolioState, SwingtraderError>;
}
