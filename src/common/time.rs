// src/common/time.rs

use chrono::{DateTime, FixedOffset, Local};

/// "Agora" no fuso local do servidor, com o deslocamento preservado.
/// O dia de referência do ponto é `local_now().date_naive()`.
pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}
