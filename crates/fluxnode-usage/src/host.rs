//! Host OS introspection: CPU core count and load averages.

use crate::SignalError;

/// 1, 5 and 15 minute load averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    /// One-minute average.
    pub one: f64,
    /// Five-minute average.
    pub five: f64,
    /// Fifteen-minute average.
    pub fifteen: f64,
}

/// Source of host CPU signals.
pub trait HostProbe: Send + Sync {
    /// Number of logical CPUs available to this process.
    ///
    /// # Errors
    ///
    /// Returns a [`SignalError`] if the count cannot be determined.
    fn core_count(&self) -> Result<usize, SignalError>;

    /// Current load averages.
    ///
    /// # Errors
    ///
    /// Returns a [`SignalError`] if the OS does not report them.
    fn load_average(&self) -> Result<LoadAverage, SignalError>;
}

/// Reads the signals from the running host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostProbe for SystemHost {
    /// Counts the host's online logical CPUs, ignoring any cgroup quota or
    /// affinity mask applied to this process.
    #[cfg(unix)]
    fn core_count(&self) -> Result<usize, SignalError> {
        // SAFETY: `sysconf` reads a system value and has no memory effects.
        let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        usize::try_from(n)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| SignalError::Unavailable {
                signal: "core count",
                message: format!("sysconf(_SC_NPROCESSORS_ONLN) returned {n}"),
            })
    }

    #[cfg(not(unix))]
    fn core_count(&self) -> Result<usize, SignalError> {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .map_err(|e| SignalError::Unavailable {
                signal: "core count",
                message: e.to_string(),
            })
    }

    #[cfg(unix)]
    fn load_average(&self) -> Result<LoadAverage, SignalError> {
        let mut values = [0.0_f64; 3];
        // SAFETY: `getloadavg` writes at most `nelem` (3) doubles into a
        // buffer that holds exactly 3.
        let n = unsafe { libc::getloadavg(values.as_mut_ptr(), 3) };
        if n < 2 {
            return Err(SignalError::Unavailable {
                signal: "load average",
                message: format!("getloadavg returned {n}"),
            });
        }
        Ok(LoadAverage {
            one: values[0],
            five: values[1],
            fifteen: if n > 2 { values[2] } else { values[1] },
        })
    }

    #[cfg(not(unix))]
    fn load_average(&self) -> Result<LoadAverage, SignalError> {
        Err(SignalError::Unavailable {
            signal: "load average",
            message: "load averages are not reported on this platform".into(),
        })
    }
}
