use crate::domain::payment::Payment;
use crate::error::Result;
use std::io::Write;

pub const HEADERS: [&str; 10] = [
    "id",
    "sender",
    "recipient",
    "amount",
    "currency",
    "network",
    "batch_id",
    "state",
    "dispute_reason",
    "created_at",
];

/// Writes the payment table as CSV, header first even when empty.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        Self { writer }
    }

    pub fn write_payments<I>(&mut self, payments: I) -> Result<()>
    where
        I: IntoIterator<Item = Payment>,
    {
        self.writer.write_record(HEADERS)?;
        for payment in payments {
            self.writer.serialize(payment)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
