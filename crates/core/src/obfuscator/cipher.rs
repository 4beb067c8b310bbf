//! AES-256-CBC file obfuscation.
//!
//! The key and IV are fixed for the whole catalog, so identical plaintexts
//! produce identical ciphertexts and nothing is authenticated. This keeps
//! files opaque to casual inspection only; it is not confidentiality.

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::generic_array::GenericArray;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};

use super::config::ObfuscationConfig;
use super::error::ObfuscateError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

const BLOCK_SIZE: usize = 16;
const CHUNK_SIZE: usize = 64 * 1024;

/// Key and IV used by the obfuscation pass.
#[derive(Clone, PartialEq, Eq)]
pub struct ObfuscationKey {
    key: [u8; 32],
    iv: [u8; 16],
}

impl ObfuscationKey {
    /// Creates a key from raw bytes.
    pub fn new(key: [u8; 32], iv: [u8; 16]) -> Self {
        Self { key, iv }
    }

    /// Decodes a 64-character hex key and a 32-character hex IV.
    pub fn from_hex(key_hex: &str, iv_hex: &str) -> Result<Self, ObfuscateError> {
        let mut key = [0u8; 32];
        let mut iv = [0u8; 16];
        hex::decode_to_slice(key_hex.trim(), &mut key)
            .map_err(|e| ObfuscateError::invalid_key(format!("key: {e}")))?;
        hex::decode_to_slice(iv_hex.trim(), &mut iv)
            .map_err(|e| ObfuscateError::invalid_key(format!("iv: {e}")))?;
        Ok(Self { key, iv })
    }

    /// Decodes the key and IV of an obfuscation configuration.
    pub fn from_config(config: &ObfuscationConfig) -> Result<Self, ObfuscateError> {
        Self::from_hex(&config.key_hex, &config.iv_hex)
    }

    fn encryptor(&self) -> Aes256CbcEnc {
        Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
    }

    fn decryptor(&self) -> Aes256CbcDec {
        Aes256CbcDec::new(&self.key.into(), &self.iv.into())
    }

    /// Encrypts a buffer with PKCS#7 padding.
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        self.encryptor().encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypts a buffer produced by [`ObfuscationKey::encrypt`] or
    /// [`ObfuscationKey::encrypt_file`].
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, ObfuscateError> {
        self.decryptor()
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|e| ObfuscateError::Decrypt {
                reason: e.to_string(),
            })
    }

    /// Streams `input` through the cipher into `output`.
    ///
    /// Full blocks are encrypted as they are read; the tail is padded at
    /// end of input. Returns the number of bytes written.
    pub async fn encrypt_file(&self, input: &Path, output: &Path) -> std::io::Result<u64> {
        let mut reader = File::open(input).await?;
        let mut writer = BufWriter::new(File::create(output).await?);
        let mut cipher = self.encryptor();

        let mut chunk = vec![0u8; CHUNK_SIZE];
        let mut pending: Vec<u8> = Vec::with_capacity(CHUNK_SIZE + BLOCK_SIZE);
        let mut written = 0u64;

        loop {
            let n = reader.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            pending.extend_from_slice(&chunk[..n]);

            let full = pending.len() - pending.len() % BLOCK_SIZE;
            encrypt_blocks(&mut cipher, &mut pending[..full]);
            writer.write_all(&pending[..full]).await?;
            written += full as u64;
            pending.drain(..full);
        }

        // PKCS#7: always pad, a whole block when the input is block-aligned.
        let pad = BLOCK_SIZE - pending.len();
        pending.resize(BLOCK_SIZE, pad as u8);
        encrypt_blocks(&mut cipher, &mut pending);
        writer.write_all(&pending).await?;
        written += BLOCK_SIZE as u64;

        writer.flush().await?;
        Ok(written)
    }
}

fn encrypt_blocks(cipher: &mut Aes256CbcEnc, data: &mut [u8]) {
    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        cipher.encrypt_block_mut(GenericArray::from_mut_slice(block));
    }
}

impl std::fmt::Debug for ObfuscationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ObfuscationKey([REDACTED])")
    }
}
