//! Anti-forgery codes and ephemeral port probing.

use rand::Rng;

/// Length of an anti-forgery code in decimal digits.
pub const CODE_LENGTH: usize = 16;

/// Generate a fresh anti-forgery code: [`CODE_LENGTH`] decimal digits from
/// the thread-local CSPRNG. Codes are single-use and never logged.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Ask the kernel for a currently-free loopback port.
///
/// The probe listener is dropped before returning, so the port is a hint
/// rather than a reservation; the real bind can still lose the race, which
/// surfaces as a `PortBind` error at listener start.
pub fn free_port() -> std::io::Result<u16> {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0))?;
    Ok(listener.local_addr()?.port())
}
