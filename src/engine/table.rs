use crate::config::Operand;
use crate::engine::pass::PassState;
use crate::engine::Engine;
use crate::error::EvalFault;
use crate::node::{TableConfig, Value};
use crate::trace::{Trace, TraceSegment};
use log::warn;

impl<'a> Engine<'a> {
    /// Resolves a table capacity: row and column keys come from the
    /// submission (or constants), then one cell is read from the named
    /// table. A missing table, row or column is a lookup miss rendered
    /// inline, never an error.
    pub(crate) fn eval_table(
        &self,
        config: &TableConfig,
        pass: &mut PassState,
    ) -> (Option<f64>, Trace) {
        let mut trace = Trace::new();

        let row = self.lookup_key(&config.row, pass);
        let column = self.lookup_key(&config.column, pass);

        let cell = self.tables.table(&config.table_name).and_then(|table| {
            match (&row, &column) {
                (Some(r), Some(c)) => table.cell(r, c).map(str::to_string),
                _ => None,
            }
        });

        let row_text = row.unwrap_or_else(|| "?".into());
        let column_text = column.unwrap_or_else(|| "?".into());

        match cell {
            Some(raw) => {
                let value = cell_value(&raw);
                let result = value.as_number();
                trace.push(TraceSegment::TableHit {
                    table: config.table_name.clone(),
                    row: row_text,
                    column: column_text,
                    value,
                });
                (result, trace)
            }
            None => {
                warn!(
                    "table lookup miss: {}[{}][{}]",
                    config.table_name, row_text, column_text
                );
                let fault = EvalFault::TableLookupMiss {
                    table: config.table_name.clone(),
                    row: row_text,
                    column: column_text,
                };
                pass.fault(fault.clone());
                trace.push(TraceSegment::Fault(fault));
                (None, trace)
            }
        }
    }

    /// A lookup key is the display form of the operand's live value.
    fn lookup_key(&self, operand: &Operand, pass: &mut PassState) -> Option<String> {
        match operand {
            Operand::NodeValue { node_id } => self
                .resolve_node_value(node_id, pass)
                .map(|v| v.to_string()),
            Operand::Constant { value } => Some(value.to_string()),
        }
    }
}

/// Table cells are stored as text; numeric cells become numbers so the
/// lookup can feed arithmetic.
fn cell_value(raw: &str) -> Value {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        _ => Value::Text(raw.to_string()),
    }
}
