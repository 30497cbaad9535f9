// Public holidays of the nearest-Monday jurisdiction, already transferred.
// (month, day) pairs per year.

pub(crate) const JURISDICTION: &str = "CO";

pub(crate) const OPERATIVE_YEARS: &[(i32, &[(u32, u32)])] = &[
    (
        2024,
        &[
            (1, 1),
            (1, 8),
            (3, 25),
            (3, 28),
            (3, 29),
            (5, 1),
            (5, 13),
            (6, 3),
            (6, 10),
            (7, 1),
            (7, 20),
            (8, 7),
            (8, 19),
            (10, 14),
            (11, 4),
            (11, 11),
            (12, 8),
            (12, 25),
        ],
    ),
    (
        2025,
        &[
            (1, 1),
            (1, 6),
            (3, 24),
            (4, 17),
            (4, 18),
            (5, 1),
            (6, 2),
            (6, 23),
            (6, 30),
            (7, 20),
            (8, 7),
            (8, 18),
            (10, 13),
            (11, 3),
            (11, 17),
            (12, 8),
            (12, 25),
        ],
    ),
    (
        2026,
        &[
            (1, 1),
            (1, 12),
            (3, 23),
            (4, 2),
            (4, 3),
            (5, 1),
            (5, 18),
            (6, 8),
            (6, 15),
            (6, 29),
            (7, 20),
            (8, 7),
            (8, 17),
            (10, 12),
            (11, 2),
            (11, 16),
            (12, 8),
            (12, 25),
        ],
    ),
];
