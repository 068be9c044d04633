//! AES-128-CBC payload decryption.
//!
//! Inputs are standard base64. Padding is PKCS#7 with the pad length taken
//! from the last byte and bounded to `1..=16`. Every malformed input yields
//! [`WeError::Validation`]; nothing here panics on caller data.
use crate::records::{PhoneInfo, UserInfo};
use aes::Aes128;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
use serde::de::DeserializeOwned;
use serde_json::Value;
use weapi_types::{Result, WeError};

type Aes128CbcDec = cbc::Decryptor<Aes128>;

const KEY_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Decrypts client payloads and checks they were issued for `app_id`.
#[derive(Debug, Clone)]
pub struct PayloadCipher {
    app_id: String,
}

impl PayloadCipher {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Decrypt to plaintext bytes with the padding stripped.
    ///
    /// # Errors
    ///
    /// Returns [`WeError::Validation`] on malformed base64, a key or IV that
    /// is not 16 bytes, ciphertext not aligned to the key length, or invalid
    /// padding.
    #[allow(clippy::unused_self)]
    pub fn decrypt(&self, ciphertext_b64: &str, key_b64: &str, iv_b64: &str) -> Result<Vec<u8>> {
        let ciphertext = decode_b64("ciphertext", ciphertext_b64)?;
        let key = decode_b64("key", key_b64)?;
        let iv = decode_b64("iv", iv_b64)?;

        if key.len() != KEY_LEN {
            return Err(WeError::Validation(format!(
                "key must be {KEY_LEN} bytes, got {}",
                key.len()
            )));
        }
        if iv.len() != BLOCK_LEN {
            return Err(WeError::Validation(format!(
                "iv must be {BLOCK_LEN} bytes, got {}",
                iv.len()
            )));
        }
        if ciphertext.len() % key.len() != 0 {
            return Err(WeError::Validation(format!(
                "ciphertext length {} is not a multiple of {}",
                ciphertext.len(),
                key.len()
            )));
        }

        let mut buffer = ciphertext;
        let plain_len = Aes128CbcDec::new_from_slices(&key, &iv)
            .map_err(|e| WeError::Validation(format!("failed to initialize AES decryptor: {e}")))?
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|e| WeError::Validation(format!("decryption failed: {e}")))?
            .len();
        buffer.truncate(plain_len);

        let unpadded = strip_pkcs7(&buffer)?;
        buffer.truncate(unpadded);
        Ok(buffer)
    }

    /// Decrypt and parse the plaintext as JSON into `T`.
    ///
    /// A payload carrying `watermark.appid` must name this application as a
    /// string; any other value is rejected.
    ///
    /// # Errors
    ///
    /// - [`WeError::Validation`] as for [`decrypt`](Self::decrypt), or
    ///   `origin mismatch` when the watermark names another application.
    /// - [`WeError::Decode`] if the plaintext is not JSON or does not match `T`.
    pub fn decrypt_into<T: DeserializeOwned>(
        &self,
        ciphertext_b64: &str,
        key_b64: &str,
        iv_b64: &str,
    ) -> Result<T> {
        let plain = self.decrypt(ciphertext_b64, key_b64, iv_b64)?;
        let value: Value =
            serde_json::from_slice(&plain).map_err(|e| WeError::decode(&e, &plain))?;

        if let Some(appid) = value.get("watermark").and_then(|w| w.get("appid"))
            && appid.as_str() != Some(self.app_id.as_str())
        {
            tracing::warn!(expected = %self.app_id, found = %appid, "decrypted payload watermark mismatch");
            return Err(WeError::Validation("origin mismatch".into()));
        }

        serde_json::from_value(value).map_err(|e| WeError::decode(&e, &plain))
    }

    /// Decrypt a `wx.getUserInfo` payload.
    ///
    /// # Errors
    ///
    /// See [`decrypt_into`](Self::decrypt_into).
    pub fn decrypt_user_info(
        &self,
        ciphertext_b64: &str,
        key_b64: &str,
        iv_b64: &str,
    ) -> Result<UserInfo> {
        self.decrypt_into(ciphertext_b64, key_b64, iv_b64)
    }

    /// Decrypt a `getPhoneNumber` payload.
    ///
    /// # Errors
    ///
    /// See [`decrypt_into`](Self::decrypt_into).
    pub fn decrypt_phone_info(
        &self,
        ciphertext_b64: &str,
        key_b64: &str,
        iv_b64: &str,
    ) -> Result<PhoneInfo> {
        self.decrypt_into(ciphertext_b64, key_b64, iv_b64)
    }
}

fn decode_b64(field: &str, input: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(input)
        .map_err(|e| WeError::Validation(format!("{field} is not valid base64: {e}")))
}

/// Returns the plaintext length once the PKCS#7 padding is removed.
fn strip_pkcs7(plain: &[u8]) -> Result<usize> {
    let Some(&last) = plain.last() else {
        return Err(WeError::Validation("empty plaintext".into()));
    };
    let pad = usize::from(last);
    if pad == 0 || pad > BLOCK_LEN || pad > plain.len() {
        return Err(WeError::Validation(format!("invalid padding length {pad}")));
    }
    Ok(plain.len() - pad)
}
