use crate::application::dashboard::LeaseOverview;
use crate::domain::payment::Payment;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ReportRow {
    record: &'static str,
    id: String,
    lease: String,
    status: String,
    amount: String,
    detail: String,
}

/// Writes the final ledger state as one CSV table: a `lease` row per lease
/// (detail carries `all_required_complete`) followed by a `payment` row per
/// payment (detail carries the transaction reference or failure note).
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    pub fn write_report(
        &mut self,
        mut overviews: Vec<LeaseOverview>,
        mut payments: Vec<Payment>,
    ) -> Result<()> {
        overviews.sort_by(|a, b| a.lease_id.cmp(&b.lease_id));
        payments.sort_by(|a, b| a.id.cmp(&b.id));

        for overview in overviews {
            self.writer.serialize(ReportRow {
                record: "lease",
                id: overview.lease_id,
                lease: String::new(),
                status: overview.status.to_string(),
                amount: String::new(),
                detail: overview.all_required_complete.to_string(),
            })?;
        }
        for payment in payments {
            let detail = payment
                .tx_ref
                .or(payment.failure_note)
                .unwrap_or_default();
            self.writer.serialize(ReportRow {
                record: "payment",
                id: payment.id,
                lease: payment.lease,
                status: payment.status.to_string(),
                amount: payment.amount.to_string(),
                detail,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
