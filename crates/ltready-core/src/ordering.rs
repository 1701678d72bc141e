use ltready_parser::IntermediateRecord;

/// Sorts records by acquisition time. The sort is stable, so samples sharing
/// a timestamp keep the order in which they were collected.
pub fn order_chronologically(mut records: Vec<IntermediateRecord>) -> Vec<IntermediateRecord> {
    records.sort_by_key(|record| record.timestamp);
    records
}
