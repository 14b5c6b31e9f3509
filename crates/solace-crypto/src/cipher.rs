use aes::Aes256;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use rand::RngCore;
use sha2::Sha256;

use crate::CryptoError;
use crate::keys::Passphrase;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// OpenSSL salted-format header.
const MAGIC: &[u8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const MAC_KEY_LEN: usize = 32;
const TAG_LEN: usize = 32;
const BLOCK_LEN: usize = 16;

struct DerivedKeys {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
    mac_key: [u8; MAC_KEY_LEN],
}

/// OpenSSL `EVP_BytesToKey` (MD5, one round), stretched to cover the MAC key too.
/// The first 48 bytes match what `openssl enc -md md5` derives for key and IV.
fn derive_keys(passphrase: &[u8], salt: &[u8]) -> DerivedKeys {
    let mut material = Vec::with_capacity(KEY_LEN + IV_LEN + MAC_KEY_LEN + 16);
    let mut block: Vec<u8> = Vec::new();

    while material.len() < KEY_LEN + IV_LEN + MAC_KEY_LEN {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(passphrase);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        material.extend_from_slice(&block);
    }

    let mut keys = DerivedKeys {
        key: [0u8; KEY_LEN],
        iv: [0u8; IV_LEN],
        mac_key: [0u8; MAC_KEY_LEN],
    };
    keys.key.copy_from_slice(&material[..KEY_LEN]);
    keys.iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + IV_LEN]);
    keys.mac_key
        .copy_from_slice(&material[KEY_LEN + IV_LEN..KEY_LEN + IV_LEN + MAC_KEY_LEN]);
    keys
}

fn mac_for(mac_key: &[u8], salt: &[u8], ciphertext: &[u8]) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(mac_key).ok()?;
    mac.update(salt);
    mac.update(ciphertext);
    Some(mac)
}

/// Encrypt a UTF-8 string with AES-256-CBC/PKCS7 under a fresh random salt.
/// Returns base64 of `Salted__ || salt || ciphertext || tag`.
pub fn encrypt(plain: &str, passphrase: &Passphrase) -> Result<String, CryptoError> {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    encrypt_with_salt(plain, passphrase, &salt)
}

fn encrypt_with_salt(
    plain: &str,
    passphrase: &Passphrase,
    salt: &[u8; SALT_LEN],
) -> Result<String, CryptoError> {
    let keys = derive_keys(passphrase.as_bytes(), salt);

    let ciphertext = Aes256CbcEnc::new_from_slices(&keys.key, &keys.iv)
        .map_err(|e| CryptoError::Encrypt(e.to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(plain.as_bytes());

    let tag = mac_for(&keys.mac_key, salt, &ciphertext)
        .ok_or_else(|| CryptoError::Encrypt("invalid MAC key".into()))?
        .finalize()
        .into_bytes();

    let mut out = Vec::with_capacity(MAGIC.len() + SALT_LEN + ciphertext.len() + TAG_LEN);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(salt);
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&tag);

    Ok(BASE64.encode(out))
}

/// Decrypt a string produced by [`encrypt`].
///
/// Never fails loudly: bad base64, a wrong passphrase, a tag mismatch,
/// bad padding, or non-UTF-8 plaintext all come back as `None`.
pub fn decrypt(ciphertext: &str, passphrase: &Passphrase) -> Option<String> {
    let raw = BASE64.decode(ciphertext.trim()).ok()?;
    let body = raw.strip_prefix(MAGIC)?;
    if body.len() < SALT_LEN + BLOCK_LEN + TAG_LEN {
        return None;
    }

    let (salt, rest) = body.split_at(SALT_LEN);
    let (encrypted, tag) = rest.split_at(rest.len() - TAG_LEN);
    if encrypted.len() % BLOCK_LEN != 0 {
        return None;
    }

    let keys = derive_keys(passphrase.as_bytes(), salt);
    mac_for(&keys.mac_key, salt, encrypted)?
        .verify_slice(tag)
        .ok()?;

    let plain = Aes256CbcDec::new_from_slices(&keys.key, &keys.iv)
        .ok()?
        .decrypt_padded_vec_mut::<Pkcs7>(encrypted)
        .ok()?;

    String::from_utf8(plain).ok()
}
