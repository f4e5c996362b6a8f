//! Device geolocation with tiered-accuracy acquisition.
//!
//! A fresh high-accuracy fix is requested first; if it has not resolved
//! before the watchdog fires, a low-accuracy fallback (accepting cached
//! fixes) runs alongside it and the first success wins. The loser is not
//! cancelled, its late result simply lands in a dropped channel.

use std::cell::Cell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{Either, select};
use futures::pin_mut;
use gloo_timers::future::TimeoutFuture;
use shared::Coordinate;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Position, PositionError, PositionOptions};

const HIGH_ACCURACY_TIMEOUT_MS: u32 = 15_000;
/// How long the high-accuracy attempt may run before the fallback starts.
const FALLBACK_AFTER_MS: u32 = 8_000;
const LOW_ACCURACY_TIMEOUT_MS: u32 = 10_000;
/// The fallback accepts cached fixes up to a minute old.
const LOW_ACCURACY_MAX_AGE_MS: u32 = 60_000;

/// A coordinate as reported by the platform, with its accuracy radius in
/// meters. Ephemeral: recomputed per request, owned by the requesting view.
#[derive(Debug, Clone, Copy)]
pub struct LocatedCoordinate {
    pub coord: Coordinate,
    pub accuracy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    Unsupported,
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    /// An acquisition is already in flight; the new call is rejected
    /// instead of racing it.
    Busy,
}

impl LocationError {
    fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }

    /// User-facing text; the view pairs it with a retry action.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unsupported => {
                "Your browser does not support location services. Try a different browser."
            }
            Self::PermissionDenied => {
                "Location access is blocked. Allow location permission in your browser or device settings."
            }
            Self::PositionUnavailable => {
                "Location information is unavailable. Check your connection and try again later."
            }
            Self::Timeout => "The location request timed out. Check your connection and try again.",
            Self::Busy => "A location request is already running.",
        }
    }
}

/// Geolocation handle enforcing at most one in-flight acquisition.
pub struct GeoLocator {
    in_flight: Cell<bool>,
}

impl GeoLocator {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            in_flight: Cell::new(false),
        })
    }

    /// Resolve the device position. A call made while another acquisition is
    /// running fails with [`LocationError::Busy`] right away; the original
    /// call is unaffected.
    pub async fn acquire(self: Rc<Self>) -> Result<LocatedCoordinate, LocationError> {
        if self.in_flight.replace(true) {
            return Err(LocationError::Busy);
        }

        struct Reset<'a>(&'a Cell<bool>);
        impl Drop for Reset<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }
        let _reset = Reset(&self.in_flight);

        acquire_tiered().await
    }
}

async fn acquire_tiered() -> Result<LocatedCoordinate, LocationError> {
    let high = request_position(true, HIGH_ACCURACY_TIMEOUT_MS, 0);
    let fallback = async {
        TimeoutFuture::new(FALLBACK_AFTER_MS).await;
        request_position(false, LOW_ACCURACY_TIMEOUT_MS, LOW_ACCURACY_MAX_AGE_MS).await
    };
    pin_mut!(high, fallback);

    match select(high, fallback).await {
        Either::Left((Ok(located), _)) | Either::Right((Ok(located), _)) => Ok(located),
        // the early loser fails, whichever attempt remains decides the call
        Either::Left((Err(_), rest)) => rest.await,
        Either::Right((Err(_), rest)) => rest.await,
    }
}

fn geolocation() -> Result<web_sys::Geolocation, LocationError> {
    web_sys::window()
        .and_then(|window| window.navigator().geolocation().ok())
        .ok_or(LocationError::Unsupported)
}

async fn request_position(
    high_accuracy: bool,
    timeout_ms: u32,
    maximum_age_ms: u32,
) -> Result<LocatedCoordinate, LocationError> {
    let geolocation = geolocation()?;

    let (tx, rx) = oneshot::channel();
    let tx = Rc::new(Cell::new(Some(tx)));

    let on_success = {
        let tx = Rc::clone(&tx);
        Closure::<dyn FnMut(Position)>::new(move |position: Position| {
            let coords = position.coords();
            if let Some(tx) = tx.take() {
                // receiver may already be gone when the other attempt won
                let _ = tx.send(Ok(LocatedCoordinate {
                    coord: Coordinate {
                        lat: coords.latitude(),
                        lng: coords.longitude(),
                    },
                    accuracy: coords.accuracy(),
                }));
            }
        })
    };
    let on_error = {
        let tx = Rc::clone(&tx);
        Closure::<dyn FnMut(PositionError)>::new(move |error: PositionError| {
            if let Some(tx) = tx.take() {
                let _ = tx.send(Err(LocationError::from_code(error.code())));
            }
        })
    };

    let options = PositionOptions::new();
    options.set_enable_high_accuracy(high_accuracy);
    options.set_timeout(timeout_ms);
    options.set_maximum_age(maximum_age_ms);

    geolocation
        .get_current_position_with_error_callback_and_options(
            on_success.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
            &options,
        )
        .map_err(|_| LocationError::Unsupported)?;

    // the platform only holds raw function pointers; the closures must
    // outlive the request
    on_success.forget();
    on_error.forget();

    rx.await.unwrap_or(Err(LocationError::PositionUnavailable))
}
