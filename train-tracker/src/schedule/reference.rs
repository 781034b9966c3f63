//! Static route reference data.
//!
//! The schedule source carries only names and times of day, so timezone
//! and cumulative distance are resolved from these tables. Unrecognized
//! station names fall back to Moscow time and 0 km.

use chrono_tz::Tz;
use chrono_tz::Asia::{
    Irkutsk, Novosibirsk, Omsk, Krasnoyarsk, Vladivostok, Yakutsk, Yekaterinburg,
};
use chrono_tz::Europe::Moscow;

/// Error returned for an unknown IANA timezone identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timezone: {0}")]
pub struct TimezoneError(pub String);

/// Parse an IANA timezone identifier.
pub fn parse_timezone(s: &str) -> Result<Tz, TimezoneError> {
    s.parse().map_err(|_| TimezoneError(s.to_string()))
}

/// Station display name to timezone, Moscow to Khabarovsk.
static STATION_TIMEZONES: &[(&str, Tz)] = &[
    // Europe/Moscow (UTC+3)
    ("Москва", Moscow),
    ("Владимир Пасс", Moscow),
    ("Ковров 1", Moscow),
    ("Нижний Новгород Московский (Московский вокзал)", Moscow),
    ("Семенов", Moscow),
    ("Киров Пасс", Moscow),
    ("Зуевка", Moscow),
    // Asia/Yekaterinburg (UTC+5)
    ("Глазов", Yekaterinburg),
    ("Балезино", Yekaterinburg),
    ("Пермь 2", Yekaterinburg),
    ("Екатеринбург-Пассажирс", Yekaterinburg),
    ("Тюмень", Yekaterinburg),
    // Asia/Omsk (UTC+6)
    ("Омск-Пассажирский", Omsk),
    ("Татарская", Omsk),
    ("Барабинск", Omsk),
    // Asia/Novosibirsk (UTC+7)
    ("Новосибирск-Главный", Novosibirsk),
    // Asia/Krasnoyarsk (UTC+7)
    ("Юрга 1", Krasnoyarsk),
    ("Тайга", Krasnoyarsk),
    ("Анжерская", Krasnoyarsk),
    ("Мариинск", Krasnoyarsk),
    ("Боготол", Krasnoyarsk),
    ("Ачинск 1", Krasnoyarsk),
    ("Красноярск Пасс", Krasnoyarsk),
    ("Заозерная", Krasnoyarsk),
    ("Канск-Енисейский", Krasnoyarsk),
    ("Иланская", Krasnoyarsk),
    ("Решоты", Krasnoyarsk),
    ("Тайшет", Krasnoyarsk),
    ("Нижнеудинск", Krasnoyarsk),
    // Asia/Irkutsk (UTC+8)
    ("Тулун", Irkutsk),
    ("Зима", Irkutsk),
    ("Черемхово", Irkutsk),
    ("Усолье-Сибирское", Irkutsk),
    ("Ангарск", Irkutsk),
    ("Иркутск Пассажирский", Irkutsk),
    ("Слюдянка 1", Irkutsk),
    ("Улан-Удэ Пасс", Irkutsk),
    ("Петровский Завод", Irkutsk),
    ("Хилок", Irkutsk),
    ("Могзон", Irkutsk),
    // Asia/Yakutsk (UTC+9)
    ("Чита 2", Yakutsk),
    ("Карымская", Yakutsk),
    ("Шилка-Пасс.", Yakutsk),
    ("Куэнга", Yakutsk),
    ("Чернышевск-Забайкальск", Yakutsk),
    ("Зилово", Yakutsk),
    ("Могоча", Yakutsk),
    ("Амазар", Yakutsk),
    ("Ерофей Павлович", Yakutsk),
    ("Уруша", Yakutsk),
    ("Сковородино", Yakutsk),
    ("Магдагачи", Yakutsk),
    ("Шимановская", Yakutsk),
    ("Свободный", Yakutsk),
    ("Белогорск", Yakutsk),
    ("Завитая", Yakutsk),
    ("Бурея", Yakutsk),
    ("Архара", Yakutsk),
    // Asia/Vladivostok (UTC+10)
    ("Облучье", Vladivostok),
    ("Известковая", Vladivostok),
    ("Биробиджан 1", Vladivostok),
    ("Хабаровск 1", Vladivostok),
];

/// Cumulative distance from Moscow in kilometres.
static STATION_DISTANCES: &[(&str, u32)] = &[
    ("Москва", 0),
    ("Владимир Пасс", 191),
    ("Ковров 1", 257),
    ("Нижний Новгород Московский (Московский вокзал)", 442),
    ("Семенов", 512),
    ("Киров Пасс", 917),
    ("Зуевка", 1028),
    ("Глазов", 1127),
    ("Балезино", 1194),
    ("Пермь 2", 1436),
    ("Екатеринбург-Пассажирс", 1816),
    ("Тюмень", 2144),
    ("Омск-Пассажирский", 2716),
    ("Татарская", 2885),
    ("Барабинск", 3040),
    ("Новосибирск-Главный", 3343),
    ("Юрга 1", 3495),
    ("Тайга", 3571),
    ("Анжерская", 3606),
    ("Мариинск", 3719),
    ("Боготол", 3851),
    ("Ачинск 1", 3917),
    ("Красноярск Пасс", 4098),
    ("Заозерная", 4268),
    ("Канск-Енисейский", 4344),
    ("Иланская", 4375),
    ("Решоты", 4453),
    ("Тайшет", 4516),
    ("Нижнеудинск", 4680),
    ("Тулун", 4794),
    ("Зима", 4934),
    ("Черемхово", 5057),
    ("Усолье-Сибирское", 5087),
    ("Ангарск", 5100),
    ("Иркутск Пассажирский", 5185),
    ("Слюдянка 1", 5311),
    ("Улан-Удэ Пасс", 5642),
    ("Петровский Завод", 5784),
    ("Хилок", 5932),
    ("Могзон", 6053),
    ("Чита 2", 6199),
    ("Карымская", 6293),
    ("Шилка-Пасс.", 6446),
    ("Куэнга", 6500),
    ("Чернышевск-Забайкальск", 6587),
    ("Зилово", 6713),
    ("Могоча", 6906),
    ("Амазар", 7010),
    ("Ерофей Павлович", 7111),
    ("Уруша", 7211),
    ("Сковородино", 7306),
    ("Магдагачи", 7501),
    ("Шимановская", 7723),
    ("Свободный", 7815),
    ("Белогорск", 7873),
    ("Завитая", 8000),
    ("Бурея", 8037),
    ("Архара", 8088),
    ("Облучье", 8198),
    ("Известковая", 8306),
    ("Биробиджан 1", 8351),
    ("Хабаровск 1", 8521),
];

/// Major cities on the route, independent of stand length.
static MAJOR_CITIES: &[&str] = &[
    "Москва",
    "Владимир Пасс",
    "Нижний Новгород Московский (Московский вокзал)",
    "Киров Пасс",
    "Пермь 2",
    "Екатеринбург-Пассажирс",
    "Тюмень",
    "Омск-Пассажирский",
    "Новосибирск-Главный",
    "Красноярск Пасс",
    "Иркутск Пассажирский",
    "Улан-Удэ Пасс",
    "Чита 2",
    "Сковородино",
    "Биробиджан 1",
    "Хабаровск 1",
];

/// Timezone for a station name; unrecognized names default to Moscow.
pub fn timezone_for(name: &str) -> Tz {
    STATION_TIMEZONES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, tz)| *tz)
        .unwrap_or(Moscow)
}

/// Cumulative distance from Moscow; unrecognized names default to 0.
pub fn distance_for(name: &str) -> u32 {
    STATION_DISTANCES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, d)| *d)
        .unwrap_or(0)
}

/// True if the station name is one of the route's major cities.
pub fn is_major_city(name: &str) -> bool {
    MAJOR_CITIES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_station_timezones() {
        assert_eq!(timezone_for("Москва"), Moscow);
        assert_eq!(timezone_for("Иркутск Пассажирский"), Irkutsk);
        assert_eq!(timezone_for("Хабаровск 1"), Vladivostok);
    }

    #[test]
    fn unknown_station_defaults_to_moscow() {
        assert_eq!(timezone_for("Нигдеград"), Moscow);
        assert_eq!(distance_for("Нигдеград"), 0);
    }

    #[test]
    fn distances_follow_the_route_order() {
        let distances: Vec<u32> = STATION_DISTANCES.iter().map(|(_, d)| *d).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn major_cities_have_known_distances() {
        for city in MAJOR_CITIES {
            assert!(
                STATION_DISTANCES.iter().any(|(n, _)| n == city),
                "no distance for {city}"
            );
        }
    }

    #[test]
    fn parse_timezone_round_trip() {
        assert_eq!(parse_timezone("Europe/Moscow").unwrap(), Moscow);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
