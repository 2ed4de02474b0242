use crate::models::NotaSetting;
use crate::repository::NotaCounter;
use cetak_core::{EngineError, EngineResult};
use std::sync::Arc;

/// Format an invoice number. The pad width is a minimum: a value that has
/// outgrown it widens the field, it is never truncated or wrapped —
/// wraparound would mint duplicate invoice numbers.
pub fn format_nota(prefix: &str, value: i64, width: usize) -> String {
    format!("{}-{:0>width$}", prefix, value, width = width)
}

/// Generates gap-free sequential invoice numbers from the configured
/// prefix/padding rule. All state lives behind [`NotaCounter`], so numbers
/// stay unique across restarts and concurrent instances.
pub struct NotaSequencer {
    counter: Arc<dyn NotaCounter>,
}

impl NotaSequencer {
    pub fn new(counter: Arc<dyn NotaCounter>) -> Self {
        Self { counter }
    }

    /// Issue the next invoice number, e.g. `INV-002`.
    pub async fn next(&self) -> EngineResult<String> {
        let setting = self.counter.setting().await.map_err(EngineError::store)?;
        let value = self.counter.next_value().await.map_err(EngineError::store)?;
        Ok(format_nota(&setting.prefix, value, setting.pad_width()))
    }

    pub async fn setting(&self) -> EngineResult<NotaSetting> {
        self.counter.setting().await.map_err(EngineError::store)
    }

    /// Update the numbering configuration. Changing the prefix alone keeps
    /// the counter running; supplying a new start number restarts it (the
    /// start number becomes the next issued number) and refixes the pad
    /// width. Existing orders are never renumbered.
    pub async fn update_setting(
        &self,
        prefix: String,
        new_start: Option<String>,
    ) -> EngineResult<NotaSetting> {
        let current = self.counter.setting().await.map_err(EngineError::store)?;

        let (setting, reset_to) = match new_start {
            Some(start) => {
                let setting = NotaSetting {
                    prefix,
                    start_number: start,
                };
                let value = setting.start_value().ok_or_else(|| {
                    EngineError::validation(format!(
                        "start number '{}' is not numeric",
                        setting.start_number
                    ))
                })?;
                if value <= 0 {
                    return Err(EngineError::validation(
                        "start number must be positive".to_string(),
                    ));
                }
                (setting, Some(value))
            }
            None => (
                NotaSetting {
                    prefix,
                    start_number: current.start_number,
                },
                None,
            ),
        };

        self.counter
            .update_setting(setting.clone(), reset_to)
            .await
            .map_err(EngineError::store)?;
        tracing::info!(
            prefix = %setting.prefix,
            start = %setting.start_number,
            reset = reset_to.is_some(),
            "nota setting updated"
        );
        Ok(setting)
    }
}
