use metrics::counter;

/// Counters for the mutations the engine performs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryTelemetry;

impl MemoryTelemetry {
    pub fn new() -> Self {
        Self
    }

    pub fn record_snapshot(&self) {
        counter!("project_memory_snapshots_total").increment(1);
    }

    pub fn record_pruned(&self, deleted: usize, failed: usize) {
        if deleted > 0 {
            counter!("project_memory_snapshots_pruned_total", "status" => "deleted")
                .increment(deleted as u64);
        }
        if failed > 0 {
            counter!("project_memory_snapshots_pruned_total", "status" => "failed")
                .increment(failed as u64);
        }
    }

    pub fn record_entry_appended(&self, template_id: &str) {
        counter!("project_memory_entries_appended_total",
            "template" => template_id.to_string()
        )
        .increment(1);
    }

    pub fn record_assimilated(&self, imported: usize) {
        counter!("project_memory_assimilated_total").increment(imported as u64);
    }

    pub fn record_publish(&self) {
        counter!("project_memory_publish_total").increment(1);
    }
}
