//! Order execution port trait. Order transmission itself is a collaborator
//! concern; the engine only produces the request values.

use crate::domain::error::SwingtraderError;
use crate::domain::stops::Direction;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    pub symbol: String,
    pub amount: f64,
    pub direction: Direction,
    pub stop_rate: f64,
    pub take_profit_rate: Option<f64>,
    pub trailing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionReport {
    pub accepted: bool,
    pub position_id: Option<i64>,
    pub message: String,
}

pub trait ExecutionPort {
    fn open_position(&self, order: &OrderRequest) -> Result<ExecutionReport, SwingtraderError>;

    fn close_position(&self, position_id: i64) -> Result<ExecutionReport, SwingtraderError>;
}
