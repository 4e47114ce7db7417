use std::fmt;

/// Класс ошибки верхнего уровня для сообщения пользователю
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    Connection,
    Other,
}

impl FailureKind {
    /// Найти в цепочке ошибок сетевую ошибку reqwest и определить её тип
    pub fn classify(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
                if e.is_timeout() {
                    return FailureKind::Timeout;
                }
                if e.is_connect() {
                    return FailureKind::Connection;
                }
            }
        }
        FailureKind::Other
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Timeout => write!(f, "Превышено время ожидания"),
            FailureKind::Connection => write!(f, "Ошибка соединения"),
            FailureKind::Other => write!(f, "Ошибка синхронизации"),
        }
    }
}

/// Текст для вывода пользователю
pub fn failure_message(error: &anyhow::Error) -> String {
    match FailureKind::classify(error) {
        FailureKind::Timeout => format!("{}...", FailureKind::Timeout),
        kind => format!("{}: {:#}", kind, error),
    }
}
