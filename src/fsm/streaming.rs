//! One streaming period: configuration pushes, raw poll, fused update.
//!
//! Every step returns `Result`; the first failure abandons the rest of
//! the period and the caller moves the session back to RESYNCING.  Nothing
//! is retried in place.

use log::info;

use super::context::SessionContext;
use crate::app::events::AppEvent;
use crate::app::ports::{AhrsLink, SessionPorts};
use crate::error::{CommsCategory, Error, LinkError};
use crate::objects::CalibrationMode;
use crate::proto::marshal;
use crate::proto::messages::UpdateRequest;
use crate::proto::{Request, Response};
use crate::tracker::DirtyFlag;

/// Run steps 1 to 6 of a period.  The caller handles the sleep.
pub(super) fn run_period<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) -> Result<(), Error> {
    ctx.settings = io.ahrs_settings();

    sync_home(ctx, io)?;
    sync_calibration(ctx, io)?;
    sync_algorithm(ctx, io)?;

    if ctx.settings.update_raw {
        poll_raw(io)?;
    }
    if ctx.settings.update_filtered {
        exchange_update(ctx, io)?;
    }
    Ok(())
}

/// The response kind did not match the request.
pub(super) fn mismatch(request: &Request, response: &Response) -> LinkError {
    LinkError::UnexpectedResponse {
        expected: request.kind(),
        got: response.kind(),
    }
}

fn exchange<L: AhrsLink>(io: &mut L, category: CommsCategory, request: &Request) -> Result<Response, Error> {
    io.exchange(request)
        .map_err(|cause| Error::Exchange { category, cause })
}

fn unexpected(category: CommsCategory, request: &Request, response: &Response) -> Error {
    Error::Exchange {
        category,
        cause: mismatch(request, response),
    }
}

fn needs_push(ctx: &SessionContext, flag: DirtyFlag, synced: bool) -> bool {
    !synced || ctx.tracker.is_dirty(flag)
}

fn confirm_push<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P, flag: DirtyFlag) {
    ctx.tracker.clear(flag);
    info!("Pushed {:?} to coprocessor", flag);
    ctx.push_event(AppEvent::ConfigPushed(flag));
    ctx.publish_status(io);
}

// ---------------------------------------------------------------------------
// Configuration pushes
// ---------------------------------------------------------------------------

fn sync_home<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) -> Result<(), Error> {
    if !needs_push(ctx, DirtyFlag::HomeLocation, ctx.synced.home) {
        return Ok(());
    }
    ctx.synced.home = false;

    let category = CommsCategory::HomeLocation;
    let request = Request::SetMagNorth(marshal::north_request(&io.home_location()));
    match exchange(io, category, &request)? {
        Response::SetMagNorth => {}
        other => return Err(unexpected(category, &request, &other)),
    }

    ctx.synced.home = true;
    confirm_push(ctx, io, DirtyFlag::HomeLocation);
    Ok(())
}

fn sync_calibration<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) -> Result<(), Error> {
    if !needs_push(ctx, DirtyFlag::Calibration, ctx.synced.calibration) {
        return Ok(());
    }
    ctx.synced.calibration = false;

    let category = CommsCategory::Calibration;
    let request = Request::SetGetCalibration(marshal::calibration_request(&io.calibration()));
    let echo = match exchange(io, category, &request)? {
        Response::SetGetCalibration(rsp) => rsp,
        other => return Err(unexpected(category, &request, &other)),
    };

    // Patch a fresh copy: the record may have been edited during the exchange.
    let mut calibration = io.calibration();
    marshal::apply_calibration_echo(&mut calibration, &echo);
    // Our own write must not look like a user edit.
    ctx.tracker.suppress_next_calibration_notification();
    io.set_calibration(calibration);

    ctx.synced.calibration = echo.measure_var != CalibrationMode::Echo;
    confirm_push(ctx, io, DirtyFlag::Calibration);
    Ok(())
}

fn sync_algorithm<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) -> Result<(), Error> {
    if !needs_push(ctx, DirtyFlag::AlgorithmSettings, ctx.synced.algorithm) {
        return Ok(());
    }
    ctx.synced.algorithm = false;

    let category = CommsCategory::Algorithm;
    let request = Request::SetAlgorithm(marshal::algorithm_request(&ctx.settings));
    match exchange(io, category, &request)? {
        Response::SetAlgorithm => {}
        other => return Err(unexpected(category, &request, &other)),
    }

    ctx.synced.algorithm = true;
    confirm_push(ctx, io, DirtyFlag::AlgorithmSettings);
    Ok(())
}

// ---------------------------------------------------------------------------
// Data exchanges
// ---------------------------------------------------------------------------

fn poll_raw<P: SessionPorts>(io: &mut P) -> Result<(), Error> {
    let category = CommsCategory::AttitudeRaw;
    let request = Request::GetAttitudeRaw;
    match exchange(io, category, &request)? {
        Response::GetAttitudeRaw(rsp) => {
            io.set_attitude_raw(marshal::attitude_raw_from(&rsp));
            Ok(())
        }
        other => Err(unexpected(category, &request, &other)),
    }
}

fn exchange_update<P: SessionPorts>(ctx: &mut SessionContext, io: &mut P) -> Result<(), Error> {
    let send_baro = ctx.tracker.is_dirty(DirtyFlag::BaroAltitude);
    let send_gps = ctx.tracker.is_dirty(DirtyFlag::GpsPosition);

    let barometer = send_baro.then(|| marshal::baro_sample(&io.baro_altitude()));
    let gps = if send_gps {
        let before = ctx.gps.last_quality();
        let sample = ctx.gps.process(&io.gps_position(), &io.home_location());
        if sample.quality != before {
            info!("GPS quality {:?} -> {:?}", before, sample.quality);
            ctx.push_event(AppEvent::GpsQualityChanged {
                from: before,
                to: sample.quality,
            });
        }
        Some(sample)
    } else {
        None
    };

    let category = CommsCategory::Update;
    let request = Request::SetGetUpdate(UpdateRequest { barometer, gps });
    let rsp = match exchange(io, category, &request)? {
        Response::SetGetUpdate(rsp) => rsp,
        other => return Err(unexpected(category, &request, &other)),
    };

    if send_baro {
        ctx.tracker.clear(DirtyFlag::BaroAltitude);
    }
    if send_gps {
        ctx.tracker.clear(DirtyFlag::GpsPosition);
    }

    let trim = io.attitude_settings();
    io.set_attitude_actual(marshal::attitude_from_update(&rsp, &trim));
    io.set_position_actual(marshal::position_from_update(&rsp));
    marshal::apply_update_status(&mut ctx.status, &rsp);
    ctx.force_publish_status(io);
    Ok(())
}
