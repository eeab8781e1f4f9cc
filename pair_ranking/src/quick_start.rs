/*!

# Quick start

This example runs a small naming session end to end with the `namerank`
command line tool. We want to pick a baby name between three candidates:
Anna, Bob and Clara.

**Creating a list** Put one name per line in a text file:

```text
Anna
Bob
Clara
```

and turn it into a list file:

```bash
namerank import --input names.txt --title "Baby names 2026" --data baby.json
```

**Comparing** Ask for the next pair, then record what you preferred. The
`--seed` flag makes the draw reproducible; without it the seed is taken
from the clock.

```bash
namerank next --data baby.json --seed 7
namerank record --data baby.json --name-a Anna --name-b Bob --chosen a \
    --reason "Sounds nice"
```

The recorded outcome is one of `a`, `b`, `both` or `skip`. `both` counts
as a draw for each side; `skip` discards the round entirely.

**Results** After a few rounds, tabulate the leaderboard:

```bash
namerank rank --data baby.json
```

You should see output similar to:

```text
[2026-08-29T10:12:01Z INFO  pair_ranking] compute_leaderboard: folding 5 events over 3 items
[2026-08-29T10:12:01Z INFO  pair_ranking] compute_leaderboard: #1 Anna rating 1030.6 W:2 L:0 D:1
[2026-08-29T10:12:01Z INFO  pair_ranking] compute_leaderboard: #2 Clara rating 1000.4 W:1 L:1 D:1
[2026-08-29T10:12:01Z INFO  pair_ranking] compute_leaderboard: #3 Bob rating 969.0 W:0 L:2 D:0
```

`--out summary.json` writes the leaderboard as a JSON summary, and
`--reference previous.json` checks the computed summary against a stored
one, failing with a diff when they differ.

**Feedback** The reasons recorded with `--reason` and `--note` are
grouped per winning name:

```bash
namerank feedback --data baby.json --name Anna
```

If you are using the library directly instead of the CLI, the
[crate::builder::Builder] API covers the same flow in a few lines.

*/
