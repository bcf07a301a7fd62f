use crate::domain::call::{CallRecord, Invocation};
use crate::error::{EscrowError, Result};
use std::io::Read;

/// Reads a call log from a CSV source.
///
/// Expected header:
/// `caller,op,id,recipient,amount,currency,network,batch,reason,refund,members`.
/// Trailing columns a call does not use may be left empty or omitted.
pub struct CallReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CallReader<R> {
    /// Creates a new `CallReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads rows and turns each into an [`Invocation`].
    ///
    /// A malformed row yields an `Err` for that row only; reading continues.
    pub fn calls(self) -> impl Iterator<Item = Result<Invocation>> {
        self.reader.into_deserialize::<CallRecord>().map(|row| {
            row.map_err(EscrowError::from)
                .and_then(Invocation::try_from)
        })
    }
}
