use imcore::prelude::*;
use ndarray::{array, Array2};

fn key() -> ObservableKey {
    ObservableKey::quad("sync", "23", "32", "I")
}

/// Ensembles can be built one realization at a time
#[test]
fn test_incremental_ensemble() -> eyre::Result<()> {
    let mut sims = Simulations::new();
    for i in 0..4 {
        let realization = array![i as f64, 2.0 * i as f64, 1.0];
        sims.append(key(), Observable::from_realization(realization)?)?;
    }

    let ensemble = sims.get(&key())?;
    assert_eq!(ensemble.ensemble_size(), 4);
    assert_eq!(ensemble.size(), 3);
    assert_eq!(ensemble.ensemble_mean(), array![1.5, 3.0, 1.0]);
    Ok(())
}

/// Appending a realization of a different length leaves the entry untouched
#[test]
fn test_shape_mismatch_on_append() -> eyre::Result<()> {
    let mut sims = Simulations::new();
    sims.append(key(), Observable::from_rows(&[vec![1.0, 2.0, 3.0]])?)?;

    let err = sims
        .append(key(), Observable::from_rows(&[vec![1.0, 2.0]])?)
        .unwrap_err();
    assert_eq!(
        err,
        LikelihoodError::ShapeMismatch {
            key: key(),
            expected: 3,
            found: 2
        }
    );
    assert_eq!(sims.get(&key())?.ensemble_size(), 1);
    Ok(())
}

/// Overwrite replaces instead of extending
#[test]
fn test_overwrite_policy() -> eyre::Result<()> {
    let mut sims = Simulations::new();
    sims.append(key(), Observable::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]])?)?;
    sims.insert(
        key(),
        Observable::from_rows(&[vec![5.0, 6.0, 7.0]])?,
        AppendMode::Overwrite,
    )?;
    assert_eq!(sims.get(&key())?.ensemble_size(), 1);
    assert_eq!(sims.get(&key())?.size(), 3);
    Ok(())
}

/// Keys are joined on exact match of every tag
#[test]
fn test_keys_and_lookup() -> eyre::Result<()> {
    let mut meas = Measurements::new();
    meas.append(key(), Observable::from_rows(&[vec![1.0]])?, true)?;
    meas.append(
        ObservableKey::quad("sync", "23", "64", "I"),
        Observable::from_rows(&[vec![2.0]])?,
        false,
    )?;

    assert_eq!(meas.len(), 2);
    assert!(meas.has_covariance(&key()));
    assert!(!meas.has_covariance(&ObservableKey::quad("sync", "23", "64", "I")));
    assert!(matches!(
        meas.get(&ObservableKey::quad("sync", "23", "128", "I")),
        Err(LikelihoodError::KeyNotFound { .. })
    ));

    let keys: Vec<&ObservableKey> = meas.keys().collect();
    assert_eq!(keys[0], &key());
    Ok(())
}

/// Domain tags must describe the same number of pixels as the realizations
#[test]
fn test_domain_tag() -> eyre::Result<()> {
    let obs = Observable::new(Array2::zeros((5, 48)))?.with_domain(vec![4, 12])?;
    assert_eq!(obs.domain(), &[4, 12]);
    assert!(Observable::new(Array2::zeros((5, 48)))?
        .with_domain(vec![48, 2])
        .is_err());
    Ok(())
}

/// Covariances are square matrices
#[test]
fn test_covariance_store() -> eyre::Result<()> {
    let mut covs = Covariances::new();
    covs.append(key(), Array2::eye(3))?;
    assert_eq!(covs.get(&key())?.dim(), (3, 3));
    assert!(covs.append(key(), Array2::zeros((3, 2))).is_err());
    assert!(covs.append(key(), Array2::zeros((0, 0))).is_err());
    Ok(())
}
