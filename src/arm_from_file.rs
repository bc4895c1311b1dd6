//! Supports reading the arm description from YAML file (optional)

use std::path::Path;
use yaml_rust2::{Yaml, YamlLoader};

use crate::chain::KinematicChain;
use crate::config_error::ConfigError;
use crate::kinematic_traits::Position;
use crate::stepper::{Arm, IkStepper, SolverConfig};
use crate::trajectory::{Driver, FigureEight};
use crate::utils::yaml_point;

/// Arm, solver settings and the figure-eight driver parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmConfig {
    /// Initial tip of the chain before any joint is added.
    pub base: Position,

    /// Positions passed to `add_joint`, in order.
    pub joints: Vec<Position>,

    pub solver: SolverConfig,

    pub trajectory: FigureEight,

    /// Time advance per tick of the driver.
    pub dt: f64,
}

impl Default for ArmConfig {
    fn default() -> Self {
        ArmConfig {
            base: Position::zeros(),
            joints: vec![
                Position::new(1.0, 0.0, 0.0),
                Position::new(2.0, 0.0, 0.0),
                Position::new(2.5, 0.0, 0.0),
                Position::new(4.0, 0.0, 0.0),
            ],
            solver: SolverConfig::default(),
            trajectory: FigureEight::default(),
            dt: Driver::default().dt,
        }
    }
}

impl ArmConfig {
    /// Read the arm description from YAML file. YAML file like this is supported:
    /// ```yaml
    /// arm:
    ///   base: [0.0, 0.0, 0.0]
    ///   joints:
    ///     - [1.0, 0.0, 0.0]
    ///     - [2.0, 0.0, 0.0]
    ///     - [2.5, 0.0, 0.0]
    ///     - [4.0, 0.0, 0.0]
    /// solver:
    ///   singular_value_epsilon: 1.0e-9
    ///   rotation_epsilon: 1.0e-12
    /// trajectory:
    ///   scale: 2.0
    ///   center: [0.0, 1.0, 2.0]
    ///   dt: 0.01
    /// ```
    /// Only `arm` is required. The base defaults to the origin, solver and trajectory
    /// settings to their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let docs = YamlLoader::load_from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("{}", e)))?;
        let doc = docs.first()
            .ok_or_else(|| ConfigError::ParseError("empty document".to_string()))?;

        let arm = &doc["arm"];
        if arm.is_badvalue() || arm.is_null() {
            return Err(ConfigError::MissingField("arm".to_string()));
        }
        let defaults = ArmConfig::default();

        let base = optional(&arm["base"], "arm.base", defaults.base, read_point)?;
        let joints = match &arm["joints"] {
            Yaml::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| read_point(item, &format!("arm.joints[{}]", i)))
                .collect::<Result<Vec<_>, _>>()?,
            Yaml::BadValue | Yaml::Null => Vec::new(),
            other => return Err(ConfigError::InvalidValue {
                field: "arm.joints".to_string(),
                value: format!("{:?} (expected a list of points)", other),
            }),
        };

        let solver_node = &doc["solver"];
        let solver = SolverConfig {
            singular_value_epsilon: optional(&solver_node["singular_value_epsilon"],
                "solver.singular_value_epsilon", defaults.solver.singular_value_epsilon, read_number)?,
            rotation_epsilon: optional(&solver_node["rotation_epsilon"],
                "solver.rotation_epsilon", defaults.solver.rotation_epsilon, read_number)?,
        };
        solver.validate()?;

        let trajectory_node = &doc["trajectory"];
        let trajectory = FigureEight {
            scale: optional(&trajectory_node["scale"], "trajectory.scale",
                defaults.trajectory.scale, read_number)?,
            center: optional(&trajectory_node["center"], "trajectory.center",
                defaults.trajectory.center, read_point)?,
        };
        let dt = optional(&trajectory_node["dt"], "trajectory.dt", defaults.dt, read_number)?;

        Ok(ArmConfig { base, joints, solver, trajectory, dt })
    }

    /// Builds the chain by adding all joints to a chain starting at the base.
    pub fn chain(&self) -> KinematicChain {
        let mut chain = KinematicChain::new(self.base);
        for joint in &self.joints {
            chain.add_joint(*joint);
        }
        chain
    }

    pub fn arm(&self) -> Result<Arm, ConfigError> {
        Ok(Arm::new(self.chain(), IkStepper::new(self.solver)?))
    }

    pub fn driver(&self) -> Driver {
        Driver::new(self.dt)
    }

    /// Convert to string yaml representation (quick viewing, etc).
    pub fn to_yaml(&self) -> String {
        format!(
            "arm:\n  \
              base: {}\n  \
              joints:\n{}\
            solver:\n  \
              singular_value_epsilon: {:e}\n  \
              rotation_epsilon: {:e}\n\
            trajectory:\n  \
              scale: {}\n  \
              center: {}\n  \
              dt: {}\n",
            yaml_point(&self.base),
            self.joints.iter().map(|j| format!("    - {}\n", yaml_point(j)))
                .collect::<String>(),
            self.solver.singular_value_epsilon,
            self.solver.rotation_epsilon,
            self.trajectory.scale,
            yaml_point(&self.trajectory.center),
            self.dt
        )
    }
}

/// Reads the value if present, returns the default if the key is absent.
fn optional<T>(
    node: &Yaml,
    field: &str,
    default: T,
    read: fn(&Yaml, &str) -> Result<T, ConfigError>,
) -> Result<T, ConfigError> {
    match node {
        Yaml::BadValue | Yaml::Null => Ok(default),
        _ => read(node, field),
    }
}

fn read_number(node: &Yaml, field: &str) -> Result<f64, ConfigError> {
    let value = match node {
        Yaml::Real(_) => node.as_f64(),
        Yaml::Integer(i) => Some(*i as f64),
        _ => None,
    };
    match value {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: format!("{:?} (expected a finite number)", node),
        }),
    }
}

fn read_point(node: &Yaml, field: &str) -> Result<Position, ConfigError> {
    let items = node.as_vec().ok_or_else(|| ConfigError::InvalidValue {
        field: field.to_string(),
        value: format!("{:?} (expected [x, y, z])", node),
    })?;
    if items.len() != 3 {
        return Err(ConfigError::InvalidLength {
            field: field.to_string(),
            expected: 3,
            found: items.len(),
        });
    }
    Ok(Position::new(
        read_number(&items[0], field)?,
        read_number(&items[1], field)?,
        read_number(&items[2], field)?,
    ))
}
