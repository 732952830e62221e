use crate::foundation::value::Value;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5f3c_91d2_a7e4_0b68;

/// 128-bit structural digest used as node identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint {
    pub hi: u64,
    pub lo: u64,
}

impl Fingerprint {
    /// Integer-valued variant of the digest, suitable as a native hash value.
    pub fn as_u64(self) -> u64 {
        self.hi ^ self.lo.rotate_left(32)
    }

    pub fn to_hex(self) -> String {
        format!("{:016x}{:016x}", self.hi, self.lo)
    }

    /// First 12 hex digits, used in node representations.
    pub fn short_hex(self) -> String {
        let mut s = format!("{:x}", self.as_u64());
        s.truncate(12);
        s
    }
}

/// Digest of a single value; map keys are visited in sorted order, sequences in order.
pub fn fingerprint_value(v: &Value) -> Fingerprint {
    let mut h = StableHasher::new();
    h.write_value(v);
    h.finish()
}

pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn write_opt_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.write_u8(1);
                self.write_str(s);
            }
            None => self.write_u8(0),
        }
    }

    pub(crate) fn write_fingerprint(&mut self, fp: Fingerprint) {
        self.write_u64(fp.hi);
        self.write_u64(fp.lo);
    }

    pub(crate) fn write_value(&mut self, v: &Value) {
        match v {
            Value::Null => self.write_u8(0),
            Value::Bool(b) => {
                self.write_u8(1);
                self.write_u8(u8::from(*b));
            }
            Value::Int(i) => {
                self.write_u8(2);
                self.write_u64(*i as u64);
            }
            Value::Float(_) => {
                // Canonical text form so that 1.0 and 1.00 built different ways agree.
                self.write_u8(3);
                self.write_str(&v.to_string());
            }
            Value::Str(s) => {
                self.write_u8(4);
                self.write_str(s);
            }
            Value::List(items) => {
                self.write_u8(5);
                self.write_u64(items.len() as u64);
                for item in items {
                    self.write_value(item);
                }
            }
            Value::Map(map) => {
                self.write_u8(6);
                self.write_map(map.iter());
            }
        }
    }

    pub(crate) fn write_map<'a>(&mut self, entries: impl Iterator<Item = (&'a String, &'a Value)>) {
        let mut entries = entries.collect::<Vec<_>>();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        self.write_u64(entries.len() as u64);
        for (k, v) in entries {
            self.write_str(k);
            self.write_value(v);
        }
    }

    pub(crate) fn finish(self) -> Fingerprint {
        let v = self.inner.digest128();
        Fingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/hash.rs"]
mod tests;
