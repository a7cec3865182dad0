//! Scene math for the orb field.
//!
//! Everything here is a pure function of `(time, state)` — no egui types,
//! no painter, no clock reads — so the animation and interaction math is
//! testable without a graphics context. The app layer feeds in elapsed
//! time, applies the returned transforms, and paints.
//!
//! Projection follows the manual-NDC approach of the orb wall: world
//! position → camera space (azimuth/elevation orbit) → perspective NDC,
//! with behind-camera culling, and picking runs the same transform in
//! reverse order (nearest projected orb within a size-scaled hit radius).

// ─── Constants ───────────────────────────────────────────────────────────────

/// Entry animation length for user-submitted orbs (seconds).
pub const SPAWN_DURATION: f64 = 1.2;

/// Press-and-hold time required to decrypt (seconds).
pub const HOLD_DURATION: f64 = 0.5;

/// Where user orbs fly in from.
pub const SPAWN_ORIGIN: [f32; 3] = [0.0, -9.0, 0.0];

/// Vertical field of view used by both projection and picking (radians).
pub const FOV: f32 = 1.1;

// ─── Camera ──────────────────────────────────────────────────────────────────

/// Orbit camera: spherical offset around a target point.
#[derive(Debug, Clone, Copy)]
pub struct CameraParams {
    pub azimuth: f32,
    pub elevation: f32,
    pub distance: f32,
    pub target: [f32; 3],
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            azimuth: 0.6,
            elevation: 0.3,
            distance: 11.0,
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl CameraParams {
    /// Drag-rotate, matching the feel of the 3D content view.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.azimuth += dx * 0.008;
        self.elevation = (self.elevation - dy * 0.008).clamp(-1.2, 1.2);
    }

    /// Scroll-dolly with clamped range.
    pub fn dolly(&mut self, scroll: f32) {
        self.distance = (self.distance * (1.0 - scroll * 0.003)).clamp(4.0, 40.0);
    }

    pub fn eye(&self) -> [f32; 3] {
        let (sa, ca) = self.azimuth.sin_cos();
        let (se, ce) = self.elevation.sin_cos();
        [
            self.target[0] + self.distance * ce * ca,
            self.target[1] + self.distance * se,
            self.target[2] + self.distance * ce * sa,
        ]
    }
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// A world point projected to normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// NDC in [-1, 1] on both axes (may exceed slightly before culling).
    pub ndc: [f32; 2],
    /// Camera-space depth, larger = farther.
    pub depth: f32,
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let len = dot(v, v).sqrt();
    if len < 1e-6 {
        return [0.0, 0.0, 1.0];
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Project a world-space point through the orbit camera. Returns `None`
/// for points at or behind the near plane.
pub fn project(world: [f32; 3], cam: &CameraParams, aspect: f32) -> Option<Projected> {
    let eye = cam.eye();
    let forward = normalize(sub(cam.target, eye));
    let right = normalize(cross(forward, [0.0, 1.0, 0.0]));
    let up = cross(right, forward);

    let d = sub(world, eye);
    let x = dot(d, right);
    let y = dot(d, up);
    let z = dot(d, forward);

    if z < 0.1 {
        return None;
    }

    let tan_half = (FOV * 0.5).tan();
    Some(Projected {
        ndc: [x / (z * tan_half * aspect), -y / (z * tan_half)],
        depth: z,
    })
}

/// Quick off-screen test with a margin, for draw-loop culling.
pub fn off_screen(p: &Projected) -> bool {
    p.ndc[0].abs() > 1.3 || p.ndc[1].abs() > 1.3
}

// ─── Picking ─────────────────────────────────────────────────────────────────

/// One clickable projected orb.
#[derive(Debug, Clone, Copy)]
pub struct PickTarget {
    pub id: u64,
    pub projected: Projected,
    /// NDC-space hit radius, pre-scaled by apparent orb size.
    pub hit_radius: f32,
}

/// Nearest target within its hit radius, or `None` for empty space.
pub fn pick(click_ndc: [f32; 2], targets: &[PickTarget]) -> Option<u64> {
    let mut best: Option<(u64, f32)> = None;
    for t in targets {
        let dx = t.projected.ndc[0] - click_ndc[0];
        let dy = t.projected.ndc[1] - click_ndc[1];
        let dist = dx * dx + dy * dy;
        if dist < t.hit_radius * t.hit_radius
            && best.map_or(true, |(_, d)| dist < d)
        {
            best = Some((t.id, dist));
        }
    }
    best.map(|(id, _)| id)
}

// ─── Orb transforms ──────────────────────────────────────────────────────────

/// Entry animation progress, eased (cubic out), clamped to [0, 1].
pub fn spawn_progress(age: f64) -> f32 {
    let t = (age / SPAWN_DURATION).clamp(0.0, 1.0) as f32;
    1.0 - (1.0 - t).powi(3)
}

/// Lerp from the spawn origin to the orb's resting position.
pub fn spawn_position(home: [f32; 3], progress: f32) -> [f32; 3] {
    [
        SPAWN_ORIGIN[0] + (home[0] - SPAWN_ORIGIN[0]) * progress,
        SPAWN_ORIGIN[1] + (home[1] - SPAWN_ORIGIN[1]) * progress,
        SPAWN_ORIGIN[2] + (home[2] - SPAWN_ORIGIN[2]) * progress,
    ]
}

/// Gentle vertical drift, phase-shifted per orb.
pub fn float_offset(time: f64, phase: f32) -> f32 {
    ((time * 0.4) as f32 + phase * 0.7).sin() * 0.12
}

/// Per-orb phase from its id (golden-ratio spread).
pub fn orb_phase(id: u64) -> f32 {
    id as f32 * 1.618
}

/// Scale factor: idle breathing, or an emphatic pulse while highlighted.
pub fn pulse_scale(time: f64, speed: f32, highlighted: bool) -> f32 {
    if highlighted {
        1.25 + ((time * 6.0) as f32).sin() * 0.15
    } else {
        1.0 + ((time as f32) * speed * 1.7).sin() * 0.04
    }
}

/// Silhouette rotation angle.
pub fn spin(time: f64, speed: f32) -> f32 {
    (time as f32) * speed * 0.8
}

/// Radial wobble for one silhouette vertex, driven by the signature's
/// distort amount.
pub fn wobble(distort: f32, time: f64, speed: f32, vertex: usize) -> f32 {
    1.0 + distort * 0.22 * ((time as f32) * speed * 2.0 + vertex as f32 * 2.4).sin()
}

// ─── Decrypt hold ────────────────────────────────────────────────────────────

/// Press-and-hold progress from press-start to `HOLD_DURATION`.
///
/// There is no partial commit: releasing early means the owner drops the
/// hold and any new press starts from zero.
#[derive(Debug, Clone, Copy)]
pub struct DecryptHold {
    started_at: f64,
}

impl DecryptHold {
    pub fn begin(now: f64) -> Self {
        Self { started_at: now }
    }

    /// Linear 0→1 over the hold duration.
    pub fn progress(&self, now: f64) -> f32 {
        ((now - self.started_at) / HOLD_DURATION).clamp(0.0, 1.0) as f32
    }

    pub fn complete(&self, now: f64) -> bool {
        now - self.started_at >= HOLD_DURATION
    }
}

// ─── Backdrop ────────────────────────────────────────────────────────────────

/// Deterministic star for the backdrop: position in [0, 1]² plus a
/// brightness in [0.2, 1.0], keyed off the star index.
pub fn star(index: u32) -> ([f32; 2], f32) {
    let mix = |seed: u32| {
        let x = seed.wrapping_mul(2654435761) ^ seed.wrapping_mul(340573321);
        ((x & 0xFFFF) as f32) / 65535.0
    };
    let x = mix(index.wrapping_mul(41).wrapping_add(3));
    let y = mix(index.wrapping_mul(59).wrapping_add(17));
    let b = 0.2 + mix(index.wrapping_mul(73).wrapping_add(29)) * 0.8;
    ([x, y], b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_target_to_center() {
        let cam = CameraParams::default();
        let p = project(cam.target, &cam, 1.6).expect("target is in front");
        assert!(p.ndc[0].abs() < 1e-4);
        assert!(p.ndc[1].abs() < 1e-4);
        assert!((p.depth - cam.distance).abs() < 1e-3);
    }

    #[test]
    fn culls_behind_camera() {
        let cam = CameraParams {
            azimuth: 0.0,
            elevation: 0.0,
            distance: 10.0,
            target: [0.0, 0.0, 0.0],
        };
        // Eye sits at +x; a point far beyond it is behind the camera.
        assert!(project([20.0, 0.0, 0.0], &cam, 1.6).is_none());
    }

    #[test]
    fn pick_hits_nearest_within_radius() {
        let near = PickTarget {
            id: 1,
            projected: Projected { ndc: [0.02, 0.0], depth: 5.0 },
            hit_radius: 0.1,
        };
        let far = PickTarget {
            id: 2,
            projected: Projected { ndc: [0.08, 0.0], depth: 5.0 },
            hit_radius: 0.1,
        };
        assert_eq!(pick([0.0, 0.0], &[far, near]), Some(1));
    }

    #[test]
    fn pick_misses_empty_space() {
        let t = PickTarget {
            id: 1,
            projected: Projected { ndc: [0.9, 0.9], depth: 5.0 },
            hit_radius: 0.05,
        };
        assert_eq!(pick([0.0, 0.0], &[t]), None);
        assert_eq!(pick([0.0, 0.0], &[]), None);
    }

    #[test]
    fn spawn_progress_clamps_and_completes() {
        assert_eq!(spawn_progress(0.0), 0.0);
        assert_eq!(spawn_progress(SPAWN_DURATION), 1.0);
        assert_eq!(spawn_progress(SPAWN_DURATION * 3.0), 1.0);
        // Monotone non-decreasing across the ramp.
        let mut last = 0.0;
        for i in 0..=24 {
            let p = spawn_progress(SPAWN_DURATION * i as f64 / 24.0);
            assert!(p >= last);
            last = p;
        }
    }

    #[test]
    fn spawn_position_interpolates() {
        let home = [2.0, 1.0, -3.0];
        assert_eq!(spawn_position(home, 0.0), SPAWN_ORIGIN);
        assert_eq!(spawn_position(home, 1.0), home);
    }

    #[test]
    fn decrypt_hold_progress_and_completion() {
        let hold = DecryptHold::begin(10.0);
        assert_eq!(hold.progress(10.0), 0.0);
        assert!((hold.progress(10.0 + HOLD_DURATION / 2.0) - 0.5).abs() < 1e-6);
        assert!(!hold.complete(10.0 + HOLD_DURATION - 0.01));
        assert!(hold.complete(10.0 + HOLD_DURATION));
        assert_eq!(hold.progress(20.0), 1.0);

        // Release-and-repress starts from zero.
        let again = DecryptHold::begin(20.0);
        assert_eq!(again.progress(20.0), 0.0);
    }

    #[test]
    fn stars_are_deterministic_and_bounded() {
        for i in 0..64 {
            let (pos, brightness) = star(i);
            assert_eq!(star(i), (pos, brightness));
            assert!((0.0..=1.0).contains(&pos[0]));
            assert!((0.0..=1.0).contains(&pos[1]));
            assert!((0.2..=1.0).contains(&brightness));
        }
    }
}
