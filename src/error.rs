// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "İşlem sırasında bir hata oluştu";

/// Errors produced while talking to the back-office API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Oturum gerekli (401)")]
    Unauthorized,

    #[error("Server returned {status}: {}", .message.as_deref().unwrap_or("-"))]
    Status { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    Shape(String),
}

impl ApiError {
    /// Message fit for the user: the server's `msg` when it sent one,
    /// otherwise a generic Turkish message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            ApiError::Unauthorized => "Oturum süresi doldu, lütfen tekrar giriş yapın".to_string(),
            _ => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// Build a status error from a raw response body, reading `msg`
    /// (or `message`) when the body is JSON.
    pub fn from_body(status: u16, body: &str) -> Self {
        if status == 401 {
            return ApiError::Unauthorized;
        }
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("msg")
                    .or_else(|| v.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            });
        ApiError::Status { status, message }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Rejections raised by the invoice status workflow before any request is sent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("'{action}' işlemi '{status}' durumundaki fatura için geçerli değil")]
    NotAllowed { action: String, status: String },

    #[error("Ödenen fatura yalnızca yönetici tarafından geri alınabilir")]
    AdminOnly,

    #[error("Ödeme için bir hesap seçilmelidir")]
    MissingAccount,

    #[error("Ödeme tutarı sıfırdan büyük olmalıdır")]
    NonPositiveAmount,

    #[error("Cari hesap ile ödeme yapılamaz: {0}")]
    CariAccount(String),

    #[error("Hesap bulunamadı: {0}")]
    UnknownAccount(String),

    #[error("Faturanın kimliği yok")]
    MissingId,
}

/// Rejections raised by the transfer guard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Kaynak ve hedef aynı olamaz")]
    SameParty,

    #[error("Cari hesaplar arası transfer desteklenmiyor")]
    CariToCari,

    #[error("Transfer tutarı sıfırdan büyük olmalıdır")]
    NonPositiveAmount,

    #[error("Kaynak ve hedef seçilmelidir")]
    MissingParty,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV başlığında miktar sütunu bulunamadı")]
    MissingQuantityColumn,

    #[error("Dosyada geçerli satır bulunamadı")]
    Empty,
}

/// Hook-style result of a user action: success flag plus an optional
/// Turkish message to show in the status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    pub fn from_api<T>(result: &ApiResult<T>, success_message: &str) -> Self {
        match result {
            Ok(_) => Self::ok(success_message),
            Err(e) => Self::failed(e.user_message()),
        }
    }
}
